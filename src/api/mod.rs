pub(crate) mod announcements;
pub(crate) mod assessments;
pub(crate) mod courses;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod notifications;
pub(crate) mod router;
pub(crate) mod users;
pub(crate) mod validation;
