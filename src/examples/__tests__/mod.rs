mod analyzer_test;
