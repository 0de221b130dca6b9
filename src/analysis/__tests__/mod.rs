mod validation_test;
