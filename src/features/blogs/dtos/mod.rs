mod blog_dto;

pub use blog_dto::{BlogForm, BlogPostResponseDto, CreateBlogPostDto, DeleteBlogPostResponseDto};
