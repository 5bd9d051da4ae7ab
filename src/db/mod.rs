pub mod models;

pub use models::{
    ClassificationRecord, NewClassification, count_records, get_all_records, get_recent_records,
    init_db, insert_record,
};
