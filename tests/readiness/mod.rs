mod poll;
