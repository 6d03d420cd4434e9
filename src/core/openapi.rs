use utoipa::{Modify, OpenApi};

use crate::features::blogs::{dtos as blogs_dtos, handlers as blogs_handlers};
use crate::features::newsletters::{dtos as newsletters_dtos, handlers as newsletters_handlers};
use crate::features::notifications::dtos as notifications_dtos;
use crate::features::subscribers::{dtos as subscribers_dtos, handlers as subscribers_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Newsletters
        newsletters_handlers::create_newsletter,
        newsletters_handlers::list_newsletters,
        newsletters_handlers::get_newsletter,
        newsletters_handlers::update_newsletter,
        newsletters_handlers::delete_newsletter,
        newsletters_handlers::download_newsletter,
        newsletters_handlers::send_newsletter,
        // Subscribers
        subscribers_handlers::subscribe,
        subscribers_handlers::list_subscribers,
        subscribers_handlers::remove_subscriber,
        subscribers_handlers::unsubscribe,
        // Blogs
        blogs_handlers::create_blog_post,
        blogs_handlers::list_blog_posts,
        blogs_handlers::get_blog_post,
        blogs_handlers::update_blog_post,
        blogs_handlers::delete_blog_post,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Newsletters
            newsletters_dtos::CreateNewsletterDto,
            newsletters_dtos::SectionInput,
            newsletters_dtos::SectionImageInput,
            newsletters_dtos::SectionAlignment,
            newsletters_dtos::SectionResponseDto,
            newsletters_dtos::FileRefDto,
            newsletters_dtos::NewsletterResponseDto,
            newsletters_dtos::DeleteNewsletterResponseDto,
            ApiResponse<newsletters_dtos::NewsletterResponseDto>,
            ApiResponse<Vec<newsletters_dtos::NewsletterResponseDto>>,
            ApiResponse<newsletters_dtos::DeleteNewsletterResponseDto>,
            // Notifications
            notifications_dtos::SendSummaryDto,
            ApiResponse<notifications_dtos::SendSummaryDto>,
            // Subscribers
            subscribers_dtos::SubscribeDto,
            subscribers_dtos::UnsubscribeDto,
            subscribers_dtos::SubscriberResponseDto,
            subscribers_dtos::RemoveSubscriberResponseDto,
            ApiResponse<subscribers_dtos::SubscriberResponseDto>,
            ApiResponse<Vec<subscribers_dtos::SubscriberResponseDto>>,
            ApiResponse<subscribers_dtos::RemoveSubscriberResponseDto>,
            // Blogs
            blogs_dtos::CreateBlogPostDto,
            blogs_dtos::BlogPostResponseDto,
            blogs_dtos::DeleteBlogPostResponseDto,
            ApiResponse<blogs_dtos::BlogPostResponseDto>,
            ApiResponse<Vec<blogs_dtos::BlogPostResponseDto>>,
            ApiResponse<blogs_dtos::DeleteBlogPostResponseDto>,
        )
    ),
    tags(
        (name = "newsletters", description = "Newsletter management and distribution"),
        (name = "subscribers", description = "Newsletter subscriber management"),
        (name = "blogs", description = "Blog post management"),
    ),
    info(
        title = "Jumpstart API",
        version = "0.1.0",
        description = "Newsletter, subscriber and blog administration API",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
