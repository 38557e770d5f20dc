pub mod document_window_route;
