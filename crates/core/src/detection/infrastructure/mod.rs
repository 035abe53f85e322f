pub mod seeta_detector;
