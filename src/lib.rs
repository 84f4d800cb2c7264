// Library root
// -----------
// The binary (`main.rs`) parses arguments and hands the resolved settings
// to `ui::run`.
//
// Module responsibilities:
// - `config`: CLI arguments, defaults, prompting and token lookup.
// - `schema`: request and response records of the prediction service.
// - `images`: directory listing and base64 encoding of image files.
// - `api`: HTTP client for the endpoint's `:predict` method.
// - `ui`: the sequential classify-and-print loop.
// - `error`: the error type shared by the modules above.
pub mod api;
pub mod config;
pub mod error;
pub mod images;
pub mod schema;
pub mod ui;
