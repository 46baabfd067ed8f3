pub mod transport;
pub mod vetch;
pub mod video;

pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use vetch::{
    ParamValue, RequestConfig, RequestData, RequestError, ResponseData, ResponseType,
    ValidationError, Vetch, VetchOptions, VetchResponse,
};
