use admin_app_file_manager::{
    pack, unpack, ArchiveEntry, BrowserState, RemoteDirectoryBrowser, RowAction, CONTENT_ID,
    FILENAME_ID, FILES_ID, FULLPATH_ID, PATH_ID, ROW_TEMPLATE_ID,
};
use admin_host::{AdminConfig, MemoryHost};
use futures::executor::block_on;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use view_binder::{
    AdminError, ElementSpec, MemoryDocument, ResponseKind, ViewRuntime, ViewTree,
};

struct Fixture {
    doc: MemoryDocument,
    host: MemoryHost,
    runtime: ViewRuntime<MemoryDocument>,
    browser: RemoteDirectoryBrowser<MemoryDocument>,
}

fn fixture() -> Fixture {
    let doc = MemoryDocument::with_body([ElementSpec::new("body").children([
        ElementSpec::new("div").id("loader"),
        ElementSpec::new("div").id("response"),
        ElementSpec::new("div").id(PATH_ID),
        ElementSpec::new("div").id(FULLPATH_ID),
        ElementSpec::input("text").id(FILENAME_ID),
        ElementSpec::new("textarea").id(CONTENT_ID),
        ElementSpec::new("table").children([
            ElementSpec::new("tbody").id(FILES_ID),
            ElementSpec::template(
                ROW_TEMPLATE_ID,
                vec![ElementSpec::new("tr").child(ElementSpec::new("td").text("{file}"))],
            ),
        ]),
    ])]);
    let host = MemoryHost::default();
    let mut runtime = ViewRuntime::new(doc.clone(), host.services(AdminConfig::default()));
    let browser = RemoteDirectoryBrowser::new(
        doc.clone(),
        runtime.services().clone(),
        runtime.notice().clone(),
    );
    runtime.register(ResponseKind::Files, browser.response_handler());
    Fixture {
        doc,
        host,
        runtime,
        browser,
    }
}

fn listing(startpath: &str) -> String {
    json!({
        "JS": {"listdir": [
            {"path": "/", "content": [
                {"name": "file1.txt", "isDir": 0},
                {"name": "file2.txt", "isDir": 0},
                {"name": "config", "isDir": 1}
            ]},
            {"path": "/config", "content": [
                {"name": "file3.txt", "isDir": 0},
                {"name": "file4.txt", "isDir": 0},
                {"name": "wifi.json", "isDir": 0}
            ]}
        ]},
        "response": {"status": 1, "text": "successful"},
        "cmd": {"callbackFn": "files_Callback", "startpath": startpath}
    })
    .to_string()
}

impl Fixture {
    fn text(&self, id: &str) -> String {
        self.doc.content(&self.doc.get(id).expect(id))
    }

    fn value(&self, id: &str) -> String {
        self.doc.value(&self.doc.get(id).expect(id))
    }

    fn set_value(&self, id: &str, value: &str) {
        self.doc.set_value(&self.doc.get(id).expect(id), value);
    }

    fn listed(&self, path: &str) {
        self.runtime
            .handle_message(&listing(path))
            .expect("listing applies");
        self.host.channel.clear();
    }

    fn rendered_labels(&self) -> Vec<String> {
        let table = self.doc.get(FILES_ID).expect("table");
        self.doc
            .descendants(&table)
            .into_iter()
            .filter(|node| self.doc.tag_name(node) == "td")
            .map(|td| self.doc.content(&td))
            .collect()
    }
}

#[test]
fn request_listing_sends_list_dir_and_clears_editor() {
    let f = fixture();
    f.set_value(FILENAME_ID, "stale.txt");
    f.set_value(CONTENT_ID, "stale");

    f.browser.request_listing("/").expect("sent");

    assert_eq!(
        f.host.channel.sent_json(),
        vec![json!({"cmd": {
            "action": "handlefiles",
            "subaction": "listDir",
            "callbackFn": "files_Callback",
            "startpath": "/"
        }})]
    );
    assert_eq!(f.value(FILENAME_ID), "");
    assert_eq!(f.value(CONTENT_ID), "");
    assert_eq!(f.browser.state(), BrowserState::ListingRequested("/".into()));
    let loader = f.doc.get("loader").expect("loader");
    assert_eq!(f.doc.style(&loader, "visibility").as_deref(), Some("hidden"));
}

#[test]
fn listing_response_renders_requested_directory() {
    let f = fixture();
    f.listed("/");

    assert_eq!(f.rendered_labels(), vec!["file1.txt", "file2.txt", "config/"]);
    assert_eq!(f.text(PATH_ID), "/");
    assert_eq!(f.browser.state(), BrowserState::Listed("/".into()));
    assert_eq!(f.text("response"), "successful");

    f.listed("/config");
    assert_eq!(
        f.rendered_labels(),
        vec!["..", "file3.txt", "file4.txt", "wifi.json"]
    );
}

#[test]
fn activating_rows_navigates_or_loads_files() {
    let f = fixture();
    f.host
        .blobs
        .insert("/config/wifi.json", r#"{"ssid":"garden","retries":3}"#);
    f.listed("/");

    assert_eq!(
        f.browser.row_actions()[2],
        RowAction::Navigate("/config".into())
    );
    block_on(f.browser.activate_row(2)).expect("navigate");
    assert_eq!(f.host.channel.sent_subactions(), vec!["listDir"]);
    assert_eq!(
        f.host.channel.sent_json()[0].pointer("/cmd/startpath"),
        Some(&json!("/config"))
    );

    f.listed("/config");
    block_on(f.browser.activate_row(3)).expect("fetch");
    assert_eq!(f.text(FULLPATH_ID), "/config/wifi.json");
    assert_eq!(f.value(FILENAME_ID), "wifi.json");
    assert_eq!(
        f.value(CONTENT_ID),
        "{\n  \"ssid\": \"garden\",\n  \"retries\": 3\n}"
    );

    assert!(matches!(
        block_on(f.browser.activate_row(42)),
        Err(AdminError::Validation(_))
    ));
}

#[test]
fn fetch_failure_is_reported() {
    let f = fixture();
    f.listed("/");
    let result = block_on(f.browser.fetch_file("/file1.txt"));
    assert!(matches!(result, Err(AdminError::Transport(_))));
    let response = f.doc.get("response").expect("response");
    assert!(f.doc.has_class(&response, "errortext"));
    assert_eq!(f.browser.state(), BrowserState::Listed("/".into()));
}

#[test]
fn invalid_json_upload_is_rejected_before_any_request() {
    let f = fixture();
    f.listed("/config");
    f.set_value(FILENAME_ID, "wifi.JSON");
    f.set_value(CONTENT_ID, "{\"ssid\": ");

    let result = block_on(f.browser.upload_file());
    assert_eq!(result, Err(AdminError::Validation("Json invalid".into())));
    assert_eq!(f.host.blobs.upload_count(), 0);
    assert_eq!(f.text("response"), "Json invalid");

    f.set_value(CONTENT_ID, "{\"ssid\": \"x\"}");
    block_on(f.browser.upload_file()).expect("valid upload");
    assert_eq!(f.host.blobs.uploaded_paths(), vec!["/config/wifi.JSON"]);
    assert_eq!(f.text("response"), "OK");
}

#[test]
fn upload_at_root_and_empty_filename() {
    let f = fixture();
    f.listed("/");
    assert!(matches!(
        block_on(f.browser.upload_file()),
        Err(AdminError::Validation(_))
    ));

    f.set_value(FILENAME_ID, "notes.txt");
    f.set_value(CONTENT_ID, "not json, not checked");
    block_on(f.browser.upload_file()).expect("upload");
    assert_eq!(
        f.host.blobs.get_text("/notes.txt").as_deref(),
        Some("not json, not checked")
    );
}

#[test]
fn mutations_validate_then_relist_immediately() {
    let f = fixture();
    f.listed("/");

    assert!(f.browser.delete_file().is_err());
    assert!(f.browser.delete_folder().is_err());
    assert!(f.browser.add_folder("").is_err());
    assert!(f.host.channel.sent_json().is_empty());

    f.listed("/config");
    f.set_value(FILENAME_ID, "file3.txt");
    f.browser.delete_file().expect("delete file");
    f.browser.add_folder("logs").expect("add folder");
    f.browser.delete_folder().expect("delete folder");

    let sent = f.host.channel.sent_json();
    let summary = sent
        .iter()
        .map(|frame| {
            let cmd = &frame["cmd"];
            let target = ["filename", "foldername", "startpath"]
                .iter()
                .find_map(|key| cmd.get(*key))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            (cmd["subaction"].as_str().unwrap_or_default().to_string(), target)
        })
        .collect::<Vec<_>>();
    let expected = [
        ("deleteFile", "/config/file3.txt"),
        ("listDir", "/config"),
        ("addFolder", "/config/logs"),
        ("listDir", "/config"),
        ("deleteFolder", "/config"),
        ("listDir", "/"),
    ]
    .map(|(a, b)| (a.to_string(), b.to_string()));
    assert_eq!(summary, expected.to_vec());
}

#[test]
fn closed_channel_blocks_mutation() {
    let f = fixture();
    f.listed("/config");
    f.host.channel.set_open(false);
    assert_eq!(f.browser.add_folder("x"), Err(AdminError::ChannelClosed));
    assert_eq!(f.text("response"), "WebSocket not open, could not send data");
}

#[test]
fn download_saves_editor_content() {
    let f = fixture();
    assert!(f.browser.download_file().is_err());
    f.set_value(FILENAME_ID, "notes.txt");
    f.set_value(CONTENT_ID, "hello");
    f.browser.download_file().expect("download");

    let saved = f.host.downloads.last().expect("saved");
    assert_eq!(saved.file_name, "notes.txt");
    assert_eq!(saved.bytes, b"hello".to_vec());
}

#[test]
fn backup_archives_only_config_files_and_skips_failures() {
    let f = fixture();
    f.listed("/");
    f.host.blobs.insert("/file1.txt", "root file");
    f.host.blobs.insert("/config/file3.txt", "three");
    f.host.blobs.insert("/config/wifi.json", "{}");
    f.host.blobs.fail_path("/config/file4.txt");

    let report = block_on(f.browser.backup_zip()).expect("backup");

    assert_eq!(report.archived, vec!["/config/file3.txt", "/config/wifi.json"]);
    assert_eq!(report.failed, vec!["/config/file4.txt"]);
    let saved = f.host.downloads.last().expect("archive downloaded");
    assert_eq!(saved.file_name, "backup.zip");
    assert_eq!(
        unpack(&saved.bytes).expect("valid zip"),
        vec![
            ArchiveEntry::new("config/file3.txt", b"three".to_vec()),
            ArchiveEntry::new("config/wifi.json", b"{}".to_vec()),
        ]
    );
    assert!(!f.host.blobs.fetched_paths().contains(&"/file1.txt".to_string()));
}

#[test]
fn restore_uploads_each_entry_and_reports_per_file() {
    let f = fixture();
    let archive = pack(&[
        ArchiveEntry::new("config/a.json", b"{\"a\":1}".to_vec()),
        ArchiveEntry::new("config/b.json", b"{\"b\":2}".to_vec()),
        ArchiveEntry::new("config/c.txt", b"c".to_vec()),
    ])
    .expect("pack");
    f.host.blobs.fail_path("/config/b.json");

    let outcomes = block_on(f.browser.restore_zip(&archive)).expect("restore");

    let summary = outcomes
        .iter()
        .map(|outcome| (outcome.path.as_str(), outcome.result.is_ok()))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            ("/config/a.json", true),
            ("/config/b.json", false),
            ("/config/c.txt", true),
        ]
    );
    assert_eq!(f.host.blobs.get_text("/config/c.txt").as_deref(), Some("c"));
    assert_eq!(f.text("response"), "Uploaded config/c.txt successfully.");

    assert!(matches!(
        block_on(f.browser.restore_zip(b"junk")),
        Err(AdminError::Archive(_))
    ));
}
