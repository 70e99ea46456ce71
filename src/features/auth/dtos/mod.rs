mod me_dto;

pub use me_dto::MeResponseDto;
