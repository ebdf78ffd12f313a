use crate::routes::{convert, files, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "cmyk-server",
    description = "Upload an RGB image, get it back as a CMYK TIFF or a JPEG preview.",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.merge(root::RootApi::openapi());
    doc.merge(convert::ConvertApi::openapi());
    doc.merge(files::FilesApi::openapi());
    doc
}
