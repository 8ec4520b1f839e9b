mod request;

pub use request::{BizId, Operator, BIZ_ID_HEADER, OPERATOR_HEADER};
