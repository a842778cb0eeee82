pub mod rekognition_service;
