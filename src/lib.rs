pub mod actuator_lib;
pub mod controller_lib;
pub mod data_structure;
