use crate::animation::{MIN_FRAMES, decode_frame, encode_gif};
use crate::api::error::{ApiError, ApiResult};
use crate::params::AnimationParams;
use crate::upload::UploadItem;
use crate::AppState;
use axum::extract::Extension;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use bytes::Bytes;
use tracing::{debug, info, warn};

pub const IMAGES_FIELD: &str = "images";
pub const DURATION_FIELD: &str = "duration";
pub const LOOP_FIELD: &str = "loop";
pub const OUTPUT_FILE_NAME: &str = "animation.gif";

const GIF_CONTENT_TYPE: HeaderValue = HeaderValue::from_static("image/gif");
const GIF_DISPOSITION: HeaderValue =
    HeaderValue::from_static("inline; filename=\"animation.gif\"");

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Raw contents of a `/create_gif` form, before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// `None` when no file part named `images` was sent at all
    pub images: Option<Vec<UploadItem>>,
    pub duration: Option<String>,
    pub loop_count: Option<String>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                IMAGES_FIELD => {
                    // parts without a filename are plain form values, not files
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        debug!("Ignoring non-file part in images field");
                        continue;
                    };
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await?;

                    form.images.get_or_insert_with(Vec::new).push(UploadItem::new(
                        file_name,
                        content_type,
                        data,
                    ));
                }
                DURATION_FIELD | LOOP_FIELD => {
                    let value = field.text().await?;
                    if name == DURATION_FIELD {
                        form.duration = Some(value);
                    } else {
                        form.loop_count = Some(value);
                    }
                }
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Apply the validation rules and return the accepted uploads in submission
    /// order together with the animation parameters.
    pub fn validate(self) -> ApiResult<(Vec<UploadItem>, AnimationParams)> {
        let images = self.images.ok_or(ApiError::MissingInput)?;
        if images.len() < MIN_FRAMES {
            return Err(ApiError::InsufficientFrames);
        }

        let params =
            AnimationParams::from_form(self.duration.as_deref(), self.loop_count.as_deref())?;

        let accepted = images
            .into_iter()
            .filter(|item| {
                let allowed = item.is_allowed();
                if !allowed {
                    warn!(
                        file_name = %item.file_name,
                        content_type = ?item.content_type,
                        "Skipping file with unsupported extension"
                    );
                }
                allowed
            })
            .collect::<Vec<_>>();

        if accepted.len() < MIN_FRAMES {
            return Err(ApiError::InsufficientFrames);
        }

        Ok((accepted, params))
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[axum::debug_handler]
pub async fn create_gif(
    Extension(state): Extension<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(%rejection, "Request is not a multipart upload");
        ApiError::MissingInput
    })?;

    let (items, params) = UploadForm::read(&mut multipart).await?.validate()?;
    let frames = items.len();
    info!(
        frames,
        duration_ms = params.duration_ms,
        loop_count = params.loop_count,
        "Creating GIF"
    );

    let gif = tokio::task::spawn_blocking(move || build_gif(&state, &items, params))
        .await
        .map_err(|error| ApiError::Internal(format!("GIF worker failed: {error}")))??;

    info!(frames, size = gif.len(), "GIF created");
    Ok(gif_response(gif))
}

fn gif_response(gif: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, GIF_CONTENT_TYPE),
            (header::CONTENT_DISPOSITION, GIF_DISPOSITION),
        ],
        Bytes::from(gif),
    )
        .into_response()
}

/// Store, decode and encode one batch. The frame store is dropped, and with it
/// every stored file, before this returns on any path.
fn build_gif(
    state: &AppState,
    items: &[UploadItem],
    params: AnimationParams,
) -> ApiResult<Vec<u8>> {
    let mut store = state.frame_store()?;
    let mut frames = Vec::with_capacity(items.len());

    for item in items {
        let path = store.persist(item)?;
        frames.push(decode_frame(&path)?);
    }
    debug!(stored = store.len(), dir = ?store.path(), "Frames decoded");

    Ok(encode_gif(&frames, params)?)
}
