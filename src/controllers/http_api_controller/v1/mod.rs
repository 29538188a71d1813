pub(crate) mod dto;
pub(crate) mod info_http_api_controller;
pub(crate) mod metadata_http_api_controller;
