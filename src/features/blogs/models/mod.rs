mod blog;

pub use blog::BlogPost;
