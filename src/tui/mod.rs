pub use app::{run_tui, Page};

mod app;
mod db;
mod fetch;
mod panels;
mod schedule;
mod state;
mod theme;
mod widgets;

#[cfg(test)]
mod test_utils;
