mod subscriber_dto;

pub use subscriber_dto::{
    RemoveSubscriberResponseDto, SubscribeDto, SubscriberResponseDto, UnsubscribeDto,
};
