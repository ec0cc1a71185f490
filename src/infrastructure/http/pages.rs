//! HTML Pages - 服务端渲染的登录流程页面
//!
//! 一个公共壳 + 各步骤的表单片段，attempt id 通过隐藏字段 /
//! 查询参数在请求间传递，服务端不依赖 cookie。

/// 页面壳
pub fn page(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="zh-CN"><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1">
<title>Telegram 会话凭据生成器</title>
<style>body{{font-family:system-ui,-apple-system,Segoe UI,Roboto,Arial,sans-serif;margin:24px;max-width:720px}}
input,button{{font:inherit;padding:10px;border-radius:8px;border:1px solid #ccc}}button{{background:#4f8cff;color:#fff;border:0}}
label{{display:block;margin:12px 0 6px}}form{{display:grid;gap:10px;margin:12px 0}}.box{{padding:12px;border:1px dashed #bbb;border-radius:10px;background:#fafbff}}
pre{{white-space:pre-wrap;word-break:break-all;background:#0f172a;color:#e5e7eb;padding:12px;border-radius:8px}}
.qr{{width:240px;height:240px;margin:12px 0}}
</style>
<h1>Telegram 会话凭据</h1>
{body}
<hr><small>⚠️ 会话字符串等同账号完整访问权限，不要泄露给任何人。</small>"#
    )
}

/// 首页：手机号表单 + QR 入口
pub fn index_page() -> String {
    page(
        r#"<div class="box">
  <b>第一步</b>：输入国际格式手机号（如 <b>+8613800138000</b>），我们会向 Telegram 请求发送验证码。<br>
  约一分钟后如果未在已登录客户端收到验证码，可以请求重发（SMS / 来电由平台决定）。
</div>
<form method="post" action="/send">
  <label>手机号</label>
  <input name="phone" placeholder="+8613800138000" required>
  <button>发送验证码</button>
</form>
<div class="box">也可以 <a href="/qr">用已登录的手机扫码登录</a>。</div>"#,
    )
}

/// 第二步：输入验证码；附带重发表单
pub fn code_sent_page(attempt_id: &str, phone_masked: &str, notice: Option<&str>) -> String {
    let attempt = escape_html(attempt_id);
    let notice = match notice {
        Some(n) => format!(r#"<div class="box">{}</div>"#, escape_html(n)),
        None => String::new(),
    };
    page(&format!(
        r#"{notice}<div class="box">
  <b>第二步</b>：验证码已发往 <b>{phone}</b>，输入 Telegram（或 SMS / 来电）收到的验证码。
</div>
<form method="post" action="/signin">
  <input type="hidden" name="attempt" value="{attempt}">
  <label>验证码</label>
  <input name="code" placeholder="12345" required>
  <button>登录</button>
</form>
<form method="post" action="/resend" style="margin-top:8px">
  <input type="hidden" name="attempt" value="{attempt}">
  <button>重发验证码</button>
</form>"#,
        phone = escape_html(phone_masked),
    ))
}

/// 2FA：输入云密码
pub fn password_page(attempt_id: &str, hint: Option<&str>) -> String {
    let hint = match hint {
        Some(h) if !h.is_empty() => {
            format!(r#"<div class="box">密码提示：<b>{}</b></div>"#, escape_html(h))
        }
        _ => String::new(),
    };
    page(&format!(
        r#"<div class="box">该账号开启了两步验证，请输入云密码。</div>
{hint}<form method="post" action="/password">
  <input type="hidden" name="attempt" value="{attempt}">
  <label>两步验证密码</label>
  <input name="password" type="password" required>
  <button>确认</button>
</form>"#,
        attempt = escape_html(attempt_id),
    ))
}

/// 完成：展示会话凭据字符串
pub fn session_page(session_string: &str) -> String {
    page(&format!(
        r#"<div class="box"><b>完成！</b>这是你的 <b>TELEGRAM_STRING_SESSION</b>：</div>
<pre>{}</pre>
<div class="box">完整复制后填入目标环境变量即可复用登录态。</div>"#,
        escape_html(session_string),
    ))
}

/// QR 登录页：内联 SVG + 轮询脚本
pub fn qr_page(attempt_id: &str, qr_svg: &str, poll_interval_secs: u64) -> String {
    let attempt = escape_html(attempt_id);
    page(&format!(
        r#"<div class="box">在已登录的 Telegram 客户端里打开 <b>设置 → 设备 → 连接桌面设备</b>，扫描下方二维码。二维码会定期自动刷新。</div>
<div class="qr" id="qr">{qr_svg}</div>
<div class="box" id="status">等待扫码确认…</div>
<script>
const attempt = "{attempt}";
const timer = setInterval(async () => {{
  try {{
    const resp = await fetch(`/qr/check?attempt=${{attempt}}`);
    const data = await resp.json();
    if (data.status === "refreshed") {{
      document.getElementById("qr").innerHTML = data.qr_svg;
    }} else if (data.status === "approved") {{
      clearInterval(timer);
      document.body.innerHTML =
        '<h1>Telegram 会话凭据</h1><div class="box"><b>完成！</b>这是你的 <b>TELEGRAM_STRING_SESSION</b>：</div>' +
        '<pre></pre><hr><small>⚠️ 会话字符串等同账号完整访问权限，不要泄露给任何人。</small>';
      document.querySelector("pre").textContent = data.session;
    }} else if (data.status === "error") {{
      clearInterval(timer);
      const s = document.getElementById("status");
      s.textContent = "出错：" + data.message;
    }}
  }} catch (e) {{
    console.error(e);
  }}
}}, {poll_interval_secs} * 1000);
</script>
<div class="box"><a href="/">改用手机号登录</a></div>"#,
    ))
}

/// 错误页，带返回首页链接
pub fn error_page(message: &str) -> String {
    page(&format!(
        r#"<div class="box">出错了：{}</div><a href="/">返回</a>"#,
        escape_html(message),
    ))
}

/// 文本插入 HTML 前的最小转义
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
