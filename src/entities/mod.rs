pub mod facility;
