mod health_tests;
mod listings_tests;
