pub(crate) mod comment_service;
pub(crate) mod federation_service;
pub(crate) mod post_service;
pub(crate) mod profile_service;
