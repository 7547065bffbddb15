pub(crate) mod announcements;
pub(crate) mod assessments;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod notifications;
pub(crate) mod submissions;
pub(crate) mod users;
