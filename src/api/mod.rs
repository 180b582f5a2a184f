pub mod scheduler_dto;
