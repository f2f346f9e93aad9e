pub mod doctor;
pub mod review;
pub mod specialty;

pub use doctor::DoctorService;
pub use review::ReviewService;
pub use specialty::SpecialtyService;
