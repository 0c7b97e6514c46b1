//! API endpoint URL builders

/// Build the dataset upload URL.
///
/// Every query value is percent-encoded; the image URL in particular carries
/// its own query string (signature, expiry) which must survive intact.
pub fn upload_url(
    base_url: &str,
    project: &str,
    api_key: &str,
    name: &str,
    split: &str,
    image_url: &str,
) -> String {
    format!(
        "{}/dataset/{}/upload?api_key={}&name={}&split={}&image={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(project),
        urlencoding::encode(api_key),
        urlencoding::encode(name),
        urlencoding::encode(split),
        urlencoding::encode(image_url)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url() {
        let url = upload_url(
            "https://api.roboflow.com",
            "vacuum-challenge",
            "key",
            "cat.jpg",
            "train",
            "https://b.s3.amazonaws.com/cat.jpg?X-Amz-Expires=3600&X-Amz-Signature=ab",
        );
        assert_eq!(
            url,
            "https://api.roboflow.com/dataset/vacuum-challenge/upload?api_key=key&name=cat.jpg&split=train&image=https%3A%2F%2Fb.s3.amazonaws.com%2Fcat.jpg%3FX-Amz-Expires%3D3600%26X-Amz-Signature%3Dab"
        );
    }

    #[test]
    fn test_upload_url_trailing_slash_and_spaces() {
        let url = upload_url("http://localhost:9000/", "p", "k", "my cat.jpg", "valid", "u");
        assert_eq!(
            url,
            "http://localhost:9000/dataset/p/upload?api_key=k&name=my%20cat.jpg&split=valid&image=u"
        );
    }
}
