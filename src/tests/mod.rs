mod common;
mod examples;

mod weekly_schedule;
mod metrics_endpoint;
