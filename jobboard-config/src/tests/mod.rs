//! Loading tests against real files and environment variables

mod file_formats;
mod precedence;
