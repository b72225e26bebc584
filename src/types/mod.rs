pub mod resume;

pub use resume::{
    is_populated, BorderStyle, Education, PhotoFile, PhotoValue, ResumeValues, WorkExperience,
    DEFAULT_COLOR_HEX,
};
