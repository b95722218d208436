pub mod open_ai_service;
