//! different utility modules used throughout the project
/// render settings: defaults and loading from a settings document
pub mod config;
/// logging setup; saving rendered equations to markdown, csv and tables
pub mod logger;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" into HashMap
pub mod task_parser;
