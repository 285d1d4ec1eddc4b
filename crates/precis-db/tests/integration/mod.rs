
mod url_repository_tests;
