pub mod ask_api_route;
pub mod ask_request;
pub mod ask_route;
