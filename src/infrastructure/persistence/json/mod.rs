//! JSON 文件存储实现

mod report_repo;

pub use report_repo::JsonBookReportRepository;
