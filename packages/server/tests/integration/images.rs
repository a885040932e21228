use serde_json::json;

use crate::common::{MAX_UPLOAD_SIZE, TestApp, routes};

mod image_upload {
    use super::*;

    #[tokio::test]
    async fn upload_stores_file_and_returns_url() {
        let app = TestApp::spawn().await;

        let res = app.upload("Holiday.PNG", b"PNG_DATA".to_vec()).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["image_id"].as_i64().unwrap() > 0);
        let url = res.body["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let on_disk = std::fs::read(app.stored_path(url)).unwrap();
        assert_eq!(on_disk, b"PNG_DATA");
    }

    #[tokio::test]
    async fn file_field_is_accepted_as_alias() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_field("file", "photo.jpg", b"JPEG".to_vec(), None)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn identical_uploads_get_distinct_names() {
        let app = TestApp::spawn().await;

        let a = app.upload("same.png", b"same".to_vec()).await;
        let b = app.upload("same.png", b"same".to_vec()).await;

        assert_eq!(a.status, 200);
        assert_eq!(b.status, 200);
        assert_ne!(a.body["url"], b.body["url"]);
        assert_ne!(a.body["image_id"], b.body["image_id"]);
    }

    #[tokio::test]
    async fn mime_type_prefers_declared_content_type() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_field("image", "picture.bin", b"GIF89a".to_vec(), Some("image/gif"))
            .await;
        let id = res.body["image_id"].as_i64().unwrap() as i32;

        let detail = app.get(&routes::image(id)).await;
        assert_eq!(detail.body["image"]["mime_type"], "image/gif");
    }

    #[tokio::test]
    async fn mime_type_is_guessed_from_extension() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_field(
                "image",
                "picture.webp",
                b"RIFF".to_vec(),
                Some("application/octet-stream"),
            )
            .await;
        let id = res.body["image_id"].as_i64().unwrap() as i32;

        let detail = app.get(&routes::image(id)).await;
        assert_eq!(detail.body["image"]["mime_type"], "image/webp");
        assert_eq!(detail.body["image"]["file_size"], 4);
    }

    #[tokio::test]
    async fn missing_file_is_an_upload_failure() {
        let app = TestApp::spawn().await;

        let form = reqwest::multipart::Form::new().text("comment", "no file here");
        let res = app
            .client
            .post(format!("http://{}{}", app.addr, routes::IMAGES))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 500);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["code"], "UPLOAD_FAILED");
        assert_eq!(body["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_and_not_recorded() {
        let app = TestApp::spawn().await;

        let res = app
            .upload("big.png", vec![0u8; MAX_UPLOAD_SIZE as usize + 1])
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.code(), "VALIDATION_ERROR");

        let list = app.get(routes::IMAGES).await;
        assert_eq!(list.body["images"], json!([]));
        let stored: Vec<_> = std::fs::read_dir(&app.uploads_dir)
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .collect();
        assert!(stored.is_empty());
    }
}

mod image_listing {
    use super::*;

    #[tokio::test]
    async fn empty_store_lists_no_images() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::IMAGES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["images"], json!([]));
    }

    #[tokio::test]
    async fn images_are_listed_newest_first_with_label_counts() {
        let app = TestApp::spawn().await;
        let first = app.upload_image("first.png").await;
        let second = app.upload_image("second.png").await;
        let cat = app.create_label("cat").await;
        let dog = app.create_label("dog").await;
        app.attach(first, cat).await;
        app.attach(first, dog).await;

        let res = app.get(routes::IMAGES).await;

        assert_eq!(res.status, 200);
        let images = res.body["images"].as_array().unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0]["id"], second);
        assert_eq!(images[0]["label_count"], 0);
        assert_eq!(images[1]["id"], first);
        assert_eq!(images[1]["label_count"], 2);
        assert!(
            images[1]["url"]
                .as_str()
                .unwrap()
                .starts_with("/uploads/")
        );
    }
}

mod image_detail {
    use super::*;

    #[tokio::test]
    async fn detail_includes_labels_sorted_by_name() {
        let app = TestApp::spawn().await;
        let image_id = app.upload_image("pets.png").await;
        let zebra = app.create_label("zebra").await;
        let cat = app.create_label("Cat").await;
        app.attach(image_id, zebra).await;
        app.attach(image_id, cat).await;

        let res = app.get(&routes::image(image_id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["image"]["id"], image_id);
        let labels = res.body["labels"].as_array().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0]["name"], "Cat");
        assert_eq!(labels[0]["label_id"], cat);
        assert_eq!(labels[1]["name"], "zebra");
        assert!(labels[1]["image_label_id"].as_i64().is_some());
        assert!(labels[1]["annotation_time"].as_str().is_some());
    }

    #[tokio::test]
    async fn unknown_image_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::image(999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.code(), "NOT_FOUND");
        assert_eq!(res.body["error"], "Image not found");
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let app = TestApp::spawn().await;

        for raw in ["abc", "0", "-1"] {
            let res = app.get(&format!("{}/{raw}", routes::IMAGES)).await;
            assert_eq!(res.status, 400, "id {raw:?} should be rejected");
            assert_eq!(res.body["error"], "Invalid image id");
        }
    }
}

mod image_deletion {
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

    use labeler_server::entity::image_label;

    use super::*;

    #[tokio::test]
    async fn delete_removes_row_associations_and_file() {
        let app = TestApp::spawn().await;
        let upload = app.upload("doomed.png", b"bytes".to_vec()).await;
        let image_id = upload.body["image_id"].as_i64().unwrap() as i32;
        let path = app.stored_path(upload.body["url"].as_str().unwrap());
        let label_id = app.create_label("cat").await;
        app.attach(image_id, label_id).await;

        let res = app.delete(&routes::image(image_id)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(app.get(&routes::image(image_id)).await.status, 404);
        assert!(!path.exists());

        let remaining = image_label::Entity::find()
            .filter(image_label::Column::ImageId.eq(image_id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(remaining, 0);

        let labels = app.get(routes::LABELS).await;
        assert_eq!(labels.body["labels"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_unknown_image_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.delete(&routes::image(42)).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn delete_succeeds_when_file_already_missing() {
        let app = TestApp::spawn().await;
        let upload = app.upload("vanished.png", b"bytes".to_vec()).await;
        let image_id = upload.body["image_id"].as_i64().unwrap() as i32;
        std::fs::remove_file(app.stored_path(upload.body["url"].as_str().unwrap())).unwrap();

        let res = app.delete(&routes::image(image_id)).await;

        assert_eq!(res.status, 200);
    }
}

mod upload_serving {
    use super::*;

    #[tokio::test]
    async fn stored_file_is_served_with_guessed_type() {
        let app = TestApp::spawn().await;
        let upload = app.upload("served.png", b"PNG_BYTES".to_vec()).await;
        let url = upload.body["url"].as_str().unwrap();

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, url))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(res.headers()["content-type"], "image/png");
        assert_eq!(res.bytes().await.unwrap().as_ref(), b"PNG_BYTES");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get("/uploads/nothing-here.png").await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn hidden_filename_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get("/uploads/.tmp").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.code(), "VALIDATION_ERROR");
    }
}

mod frontend {
    use super::*;

    #[tokio::test]
    async fn unknown_paths_fall_back_to_index() {
        let app = TestApp::spawn().await;

        let res = app.get("/some/client/route").await;

        assert_eq!(res.status, 200);
        assert!(res.text.contains("Image Labeler"));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = TestApp::spawn().await;

        let res = app.get("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["info"]["title"], "Image Labeler API");
    }
}
