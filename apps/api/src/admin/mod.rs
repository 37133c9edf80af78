// Back-office views over submitted applications. Mounted behind basic auth.

pub mod handlers;
