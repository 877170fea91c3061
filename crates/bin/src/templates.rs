//! HTML templates for the public site and the admin area
//!
//! Simple inline HTML templates without a template engine. In edit mode,
//! editable regions carry a `data-edit` attribute holding the
//! [`EditTarget`] string, and orderable lists carry `data-collection`; the
//! overlay script posts changes back to the admin endpoints.

use kindred::{
    CollectionScope,
    cms::{EditTarget, editable_fields},
    constants::text_keys,
    entity::{Album, Content, Item},
    site::{AlbumPage, HomePage},
};

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1100px;
        margin: 0 auto;
        padding: 0 20px 40px;
        background: #faf8f5;
        color: #333;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        margin-top: 40px;
    }
    h1 { color: #2d5a3d; }
    h2 {
        color: #444;
        margin-top: 40px;
        border-bottom: 2px solid #2d5a3d;
        padding-bottom: 6px;
    }
    .hero { display: flex; gap: 12px; overflow-x: auto; padding: 0; list-style: none; }
    .hero img { height: 320px; border-radius: 6px; }
    .cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 16px; padding: 0; list-style: none; }
    .card { background: white; border-radius: 6px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
    .card img { width: 100%; border-radius: 4px; }
    .muted { color: #777; font-style: italic; }
    .form-group { margin: 12px 0; }
    label { display: block; font-weight: bold; margin-bottom: 4px; }
    input[type="text"], input[type="password"], input[type="datetime-local"], textarea, select {
        width: 100%;
        padding: 8px;
        border: 1px solid #ddd;
        border-radius: 4px;
        box-sizing: border-box;
    }
    button {
        background: #2d5a3d;
        color: white;
        padding: 8px 16px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-weight: bold;
    }
    button.danger { background: #b94a48; }
    .error {
        color: #d9534f;
        background: #f2dede;
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .editing [data-edit] { outline: 2px dashed #e0a526; cursor: pointer; }
    .editing [data-collection] > li { cursor: grab; }
    #toasts { position: fixed; bottom: 20px; right: 20px; max-width: 360px; }
    #toasts div { background: #b94a48; color: white; padding: 10px; border-radius: 4px; margin-top: 8px; }
    #edit-dialog form { min-width: 360px; }
"#;

/// Overlay script loaded in edit mode.
///
/// Clicking a `data-edit` region opens a form prefilled from its
/// `data-field` children. Dragging an item of a `data-collection` list onto
/// another posts the move; the server answers with the new id order
/// before anything is written. Notifications are polled every few seconds.
const EDIT_SCRIPT: &str = r#"
(function () {
  const dialog = document.getElementById('edit-dialog');
  const form = dialog.querySelector('form');

  document.querySelectorAll('[data-edit]').forEach(function (region) {
    region.addEventListener('click', function (ev) {
      ev.preventDefault();
      ev.stopPropagation();
      form.innerHTML = '';
      const target = document.createElement('input');
      target.type = 'hidden';
      target.name = 'target';
      target.value = region.dataset.edit;
      form.appendChild(target);
      region.dataset.fields.split(',').forEach(function (name) {
        const current = region.querySelector('[data-field="' + name + '"]');
        const group = document.createElement('div');
        group.className = 'form-group';
        const label = document.createElement('label');
        label.textContent = name;
        const input = document.createElement('textarea');
        input.name = name;
        input.value = current ? (current.dataset.value || current.textContent) : '';
        group.appendChild(label);
        group.appendChild(input);
        form.appendChild(group);
      });
      const save = document.createElement('button');
      save.type = 'submit';
      save.textContent = 'Save';
      form.appendChild(save);
      dialog.showModal();
    });
  });

  document.querySelectorAll('[data-collection]').forEach(function (list) {
    let dragged = null;
    list.querySelectorAll(':scope > li[data-id]').forEach(function (li) {
      li.draggable = true;
      li.addEventListener('dragstart', function () { dragged = li; });
      li.addEventListener('dragover', function (ev) { ev.preventDefault(); });
      li.addEventListener('drop', function (ev) {
        ev.preventDefault();
        if (!dragged || dragged === li) { return; }
        fetch('/admin/reorder', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify({
            collection: list.dataset.collection,
            parent: list.dataset.parent || null,
            source: dragged.dataset.id,
            target: li.dataset.id
          })
        }).then(function (res) { return res.json(); }).then(function (body) {
          if (!body.order) { return; }
          body.order.forEach(function (id) {
            const item = list.querySelector(':scope > li[data-id="' + id + '"]');
            if (item) { list.appendChild(item); }
          });
        });
      });
    });
  });

  function poll() {
    fetch('/admin/notifications').then(function (res) { return res.json(); }).then(function (items) {
      const box = document.getElementById('toasts');
      items.forEach(function (n) {
        const toast = document.createElement('div');
        toast.textContent = n.message;
        box.appendChild(toast);
        setTimeout(function () { toast.remove(); }, 8000);
      });
    });
  }
  setInterval(poll, 4000);
  poll();
})();
"#;

fn page(title: &str, body: &str, edit: bool) -> String {
    let (body_class, overlay) = if edit {
        (
            r#" class="editing""#,
            format!(
                r#"<dialog id="edit-dialog"><form method="POST" action="/admin/edit"></form></dialog>
    <div id="toasts"></div>
    <script>{EDIT_SCRIPT}</script>"#
            ),
        )
    } else {
        ("", String::new())
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body{body_class}>
{body}
    {overlay}
</body>
</html>"#,
        title = html_escape(title),
    )
}

/// Attributes marking a region as editable, empty outside edit mode.
fn editable(target: &EditTarget, edit: bool) -> String {
    if !edit {
        return String::new();
    }
    format!(
        r#" data-edit="{}" data-fields="{}""#,
        html_escape(&target.to_string()),
        target.editable_fields().join(",")
    )
}

/// Attributes marking a list as reorderable, empty outside edit mode.
fn orderable(scope: &CollectionScope, edit: bool) -> String {
    if !edit {
        return String::new();
    }
    let parent = scope
        .parent()
        .map(|p| format!(r#" data-parent="{}""#, html_escape(p.as_str())))
        .unwrap_or_default();
    format!(
        r#" data-collection="{}"{parent}"#,
        scope.kind().as_str()
    )
}

fn field(name: &str, value: &str) -> String {
    format!(
        r#"<span data-field="{name}">{}</span>"#,
        html_escape(value)
    )
}

fn item_target<T: Content>(scope: &CollectionScope, item: &Item<T>) -> EditTarget {
    EditTarget::Item {
        scope: scope.clone(),
        id: item.id.clone(),
    }
}

fn text_region(home: &HomePage, key: &str, tag: &str, edit: bool) -> String {
    let target = EditTarget::SiteText {
        key: key.to_string(),
    };
    format!(
        "<{tag}{}>{}</{tag}>",
        editable(&target, edit),
        field("value", home.text(key))
    )
}

/// Render the public home page
pub fn home_page(home: &HomePage, edit: bool) -> String {
    let mut body = String::new();

    body.push_str(&text_region(home, text_keys::HERO_TITLE, "h1", edit));
    body.push_str(&text_region(home, text_keys::HERO_SUBTITLE, "p", edit));

    let hero_scope = CollectionScope::hero_images();
    body.push_str(&format!(r#"<ul class="hero"{}>"#, orderable(&hero_scope, edit)));
    for hero in &home.hero_images {
        body.push_str(&format!(
            r#"<li data-id="{id}"{attrs}><img src="{src}" alt="{alt}">{alt_field}{caption}</li>"#,
            id = html_escape(hero.id.as_str()),
            attrs = editable(&item_target(&hero_scope, hero), edit),
            src = html_escape(&hero.content.image_url),
            alt = html_escape(&hero.content.alt_text),
            alt_field = if edit {
                field("alt_text", &hero.content.alt_text)
            } else {
                String::new()
            },
            caption = field("caption", &hero.content.caption),
        ));
    }
    body.push_str("</ul>");

    body.push_str(&text_region(home, text_keys::MISSION, "p", edit));

    body.push_str("<h2>What we do</h2>");
    let activities_scope = CollectionScope::activities();
    body.push_str(&format!(
        r#"<ul class="cards"{}>"#,
        orderable(&activities_scope, edit)
    ));
    for activity in &home.activities {
        let image = activity
            .content
            .image_url
            .as_deref()
            .map(|url| format!(r#"<img src="{}" alt="">"#, html_escape(url)))
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<li class="card" data-id="{id}"{attrs}>{image}<h3>{title}</h3><p>{summary}</p></li>"#,
            id = html_escape(activity.id.as_str()),
            attrs = editable(&item_target(&activities_scope, activity), edit),
            title = field("title", &activity.content.title),
            summary = field("summary", &activity.content.summary),
        ));
    }
    body.push_str("</ul>");

    body.push_str("<h2>Upcoming events</h2>");
    if home.upcoming_events.is_empty() {
        body.push_str(r#"<p class="muted">No upcoming events.</p>"#);
    }
    let events_scope = CollectionScope::events();
    body.push_str(&format!(r#"<ul class="cards"{}>"#, orderable(&events_scope, edit)));
    for event in &home.upcoming_events {
        let starts_at = event.content.starts_at.to_rfc3339();
        body.push_str(&format!(
            r#"<li class="card" data-id="{id}"{attrs}><h3>{title}</h3><p><span data-field="starts_at" data-value="{raw}">{when}</span> · {location}</p><p>{description}</p></li>"#,
            id = html_escape(event.id.as_str()),
            attrs = editable(&item_target(&events_scope, event), edit),
            title = field("title", &event.content.title),
            raw = html_escape(&starts_at),
            when = event.content.starts_at.format("%-d %B %Y, %H:%M"),
            location = field("location", &event.content.location),
            description = field("description", &event.content.description),
        ));
    }
    body.push_str("</ul>");

    body.push_str("<h2>Albums</h2>");
    body.push_str(&album_cards(&home.albums, edit));

    body.push_str("<h2>Donate</h2>");
    body.push_str(&text_region(home, text_keys::DONATE_CALL, "p", edit));
    let donations_scope = CollectionScope::donation_methods();
    body.push_str(&format!(
        r#"<ul class="cards"{}>"#,
        orderable(&donations_scope, edit)
    ));
    for method in &home.donation_methods {
        let link = method
            .content
            .link
            .as_deref()
            .map(|url| {
                format!(
                    r#"<a href="{url}" data-field="link" data-value="{url}">Donate</a>"#,
                    url = html_escape(url)
                )
            })
            .unwrap_or_default();
        body.push_str(&format!(
            r#"<li class="card" data-id="{id}"{attrs}><h3>{label}</h3><p>{details}</p>{link}</li>"#,
            id = html_escape(method.id.as_str()),
            attrs = editable(&item_target(&donations_scope, method), edit),
            label = field("label", &method.content.label),
            details = field("details", &method.content.details),
        ));
    }
    body.push_str("</ul>");

    body.push_str(&format!(
        "<footer>{}</footer>",
        text_region(home, text_keys::FOOTER, "p", edit)
    ));

    page(
        if home.text(text_keys::HERO_TITLE).is_empty() {
            "Kindred"
        } else {
            home.text(text_keys::HERO_TITLE)
        },
        &body,
        edit,
    )
}

fn album_cards(albums: &[Item<Album>], edit: bool) -> String {
    if albums.is_empty() {
        return r#"<p class="muted">No albums yet.</p>"#.to_string();
    }
    let scope = CollectionScope::albums();
    let mut html = format!(r#"<ul class="cards"{}>"#, orderable(&scope, edit));
    for album in albums {
        let cover = album
            .content
            .cover_url
            .as_deref()
            .map(|url| format!(r#"<img src="{}" alt="">"#, html_escape(url)))
            .unwrap_or_default();
        html.push_str(&format!(
            r#"<li class="card" data-id="{id}"{attrs}><a href="/albums/{id}{query}">{cover}</a><h3>{title}</h3><p>{description}</p></li>"#,
            id = html_escape(album.id.as_str()),
            attrs = editable(&item_target(&scope, album), edit),
            query = if edit { "?edit=1" } else { "" },
            title = field("title", &album.content.title),
            description = field("description", &album.content.description),
        ));
    }
    html.push_str("</ul>");
    html
}

/// Render one album with its photos
pub fn album_page(album: &AlbumPage, edit: bool) -> String {
    let albums_scope = CollectionScope::albums();
    let photos_scope = CollectionScope::photos(album.album.id.clone());

    let mut body = format!(
        r#"<p><a href="/{back}">&larr; Home</a></p><div{attrs}><h1>{title}</h1><p>{description}</p></div>"#,
        back = if edit { "?edit=1" } else { "" },
        attrs = editable(&item_target(&albums_scope, &album.album), edit),
        title = field("title", &album.album.content.title),
        description = field("description", &album.album.content.description),
    );

    if album.photos.is_empty() {
        body.push_str(r#"<p class="muted">No photos in this album yet.</p>"#);
    }
    body.push_str(&format!(
        r#"<ul class="cards"{}>"#,
        orderable(&photos_scope, edit)
    ));
    for photo in &album.photos {
        body.push_str(&format!(
            r#"<li class="card" data-id="{id}"{attrs}><img src="{src}" alt="{alt}"><p>{caption}</p></li>"#,
            id = html_escape(photo.id.as_str()),
            attrs = editable(&item_target(&photos_scope, photo), edit),
            src = html_escape(&photo.content.image_url),
            alt = html_escape(&photo.content.caption),
            caption = field("caption", &photo.content.caption),
        ));
    }
    body.push_str("</ul>");

    if edit {
        body.push_str(&format!(
            r#"<h2>Add photo</h2>{}<h2>Cover</h2>{}"#,
            upload_form("photos", Some(album.album.id.as_str())),
            upload_form("cover", Some(album.album.id.as_str())),
        ));
    }

    page(&album.album.content.title, &body, edit)
}

fn upload_form(collection: &str, parent: Option<&str>) -> String {
    let parent = parent.map(html_escape).unwrap_or_default();
    format!(
        r#"<form class="upload" data-upload="{collection}" data-parent="{parent}">
    <input type="file" accept="image/*" required>
    <input type="text" name="caption" placeholder="Caption / alt text">
    <button type="submit">Upload</button>
</form>
<script>
document.querySelectorAll('form[data-upload="{collection}"]').forEach(function (form) {{
  form.onsubmit = function (ev) {{
    ev.preventDefault();
    const file = form.querySelector('input[type=file]').files[0];
    if (!file) {{ return; }}
    const params = new URLSearchParams({{ collection: form.dataset.upload, name: file.name, caption: form.caption.value }});
    if (form.dataset.parent) {{ params.set('parent', form.dataset.parent); }}
    fetch('/admin/upload?' + params, {{ method: 'POST', body: file }}).then(function () {{ location.reload(); }});
  }};
}});
</script>"#
    )
}

/// Render the login page
pub fn login_page(error: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    });

    page(
        "Kindred - Login",
        &format!(
            r#"<div class="container">
        <h1>Site administration</h1>
        {error_html}
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required autofocus>
            </div>
            <button type="submit">Login</button>
        </form>
    </div>"#
        ),
        false,
    )
}

/// One row of the admin overview table.
pub struct CollectionSummary {
    pub scope: CollectionScope,
    pub label: String,
    pub count: usize,
}

/// Render the admin dashboard
pub fn admin_page(summaries: &[CollectionSummary], albums: &[Item<Album>]) -> String {
    let rows: String = summaries
        .iter()
        .map(|s| {
            format!(
                r#"<tr><td>{}</td><td><code>{}</code></td><td>{}</td></tr>"#,
                html_escape(&s.label),
                html_escape(&s.scope.to_string()),
                s.count
            )
        })
        .collect();

    let album_options: String = albums
        .iter()
        .map(|a| {
            format!(
                r#"<option value="{}">{}</option>"#,
                html_escape(a.id.as_str()),
                html_escape(&a.content.title)
            )
        })
        .collect();

    let body = format!(
        r#"<div class="container">
    <form method="POST" action="/logout" style="float: right"><button type="submit">Logout</button></form>
    <h1>Site administration</h1>
    <p><a href="/?edit=1">Open the visual editor</a></p>

    <h2>Collections</h2>
    <table><tr><th>Collection</th><th>Scope</th><th>Items</th></tr>{rows}</table>

    <h2>New album</h2>
    {album_form}
    <h2>New activity</h2>
    {activity_form}
    <h2>New event</h2>
    {event_form}
    <h2>New donation method</h2>
    {donation_form}

    <h2>Hero image</h2>
    {hero_upload}

    <h2>Delete an item</h2>
    <form method="POST" action="/admin/delete">
        <div class="form-group"><label>Collection</label><input type="text" name="collection" placeholder="albums"></div>
        <div class="form-group"><label>Album (photos only)</label><select name="parent"><option value=""></option>{album_options}</select></div>
        <div class="form-group"><label>Item id</label><input type="text" name="id" required></div>
        <button class="danger" type="submit">Delete</button>
    </form>
</div>"#,
        album_form = create_form(CollectionScope::albums()),
        activity_form = create_form(CollectionScope::activities()),
        event_form = create_form(CollectionScope::events()),
        donation_form = create_form(CollectionScope::donation_methods()),
        hero_upload = upload_form("hero_images", None),
    );

    page("Kindred - Admin", &body, false)
}

fn create_form(scope: CollectionScope) -> String {
    let inputs: String = editable_fields(scope.kind())
        .iter()
        .map(|name| {
            let kind = if *name == "starts_at" {
                "datetime-local"
            } else {
                "text"
            };
            format!(
                r#"<div class="form-group"><label>{name}</label><input type="{kind}" name="{name}"></div>"#
            )
        })
        .collect();
    format!(
        r#"<form method="POST" action="/admin/items/{}">{inputs}<button type="submit">Create</button></form>"#,
        scope.kind().as_str()
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
