pub mod process_route;
