mod notification_dto;

pub use notification_dto::SendSummaryDto;
