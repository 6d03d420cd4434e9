mod newsletter_dto;

pub use newsletter_dto::{
    parse_sections, CreateNewsletterDto, DeleteNewsletterResponseDto, FileRefDto,
    ListNewslettersQuery, NewsletterForm, NewsletterResponseDto, ParsedSection, SectionAlignment,
    SectionImageInput, SectionInput, SectionResponseDto, SendNewsletterQuery,
    MAX_SECTION_BODY_CHARS,
};
