mod catalog;
mod common;
mod service;
