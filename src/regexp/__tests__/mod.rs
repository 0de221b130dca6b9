mod matching_test;
mod syntax_test;
