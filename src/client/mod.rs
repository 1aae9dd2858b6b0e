mod http;
mod view;

pub use http::{ClientError, TaskClient};
pub use view::TaskView;
