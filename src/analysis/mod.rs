pub mod response_stats;
