pub mod csv_import;
pub mod http_json;

pub use csv_import::CsvImportJob;
pub use http_json::HttpJsonJob;
