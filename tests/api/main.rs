mod google_sheets;
mod health_check;
mod helpers;
