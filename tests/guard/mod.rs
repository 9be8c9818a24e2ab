mod activate_once;
