//! `tekstil notifications`

use anyhow::{Result, anyhow};
use chrono::Utc;
use console::style;

use tekstil::api::models::Notification;
use tekstil::notifications::{
    ConnectionState, NotificationCenter, NotificationEvent, NotificationSocket, SocketConfig,
    fetch_notifications, format_timestamp, mark_all_read_remote, mark_read_remote,
    notification_ws_url,
};

use super::AppContext;

fn print_notification(n: &Notification) {
    let when = format_timestamp(&n.created_at, Utc::now());
    let title = if n.is_read {
        style(n.title.as_str()).dim()
    } else {
        style(n.title.as_str()).bold()
    };
    let marker = if n.is_read { " " } else { "●" };
    println!(
        "{} #{} {}  {}",
        style(marker).cyan(),
        n.id,
        title,
        style(when).dim()
    );
    if !n.message.is_empty() {
        println!("     {}", n.message);
    }
}

fn print_center(center: &NotificationCenter) {
    let groups = center.grouped();
    println!(
        "{} ({} okunmamış)",
        style("Bildirimler").bold().cyan(),
        center.unread_count()
    );
    println!();
    if groups.unread.is_empty() && groups.read.is_empty() {
        println!("{}", style("Bildirim yok.").dim());
        return;
    }
    if !groups.unread.is_empty() {
        println!("{}", style("Okunmamış").yellow());
        groups.unread.iter().for_each(|n| print_notification(n));
        println!();
    }
    if !groups.read.is_empty() {
        println!("{}", style("Okunmuş").dim());
        groups.read.iter().for_each(|n| print_notification(n));
    }
}

pub async fn cmd_notifications(
    ctx: &AppContext,
    watch: bool,
    mark_read: Option<i64>,
    mark_all_read: bool,
) -> Result<()> {
    let client = ctx.client()?;
    let load_err = |e: tekstil::errors::ApiError| anyhow!("Bildirimler alınamadı: {}", e.user_message());

    let mut center = NotificationCenter::new(fetch_notifications(&client).await.map_err(load_err)?);

    if let Some(id) = mark_read {
        mark_read_remote(&client, id)
            .await
            .map_err(|e| anyhow!(e.user_message()))?;
        center.mark_read(id);
    }
    if mark_all_read {
        mark_all_read_remote(&client)
            .await
            .map_err(|e| anyhow!(e.user_message()))?;
        center.mark_all_read();
    }

    print_center(&center);

    if !watch {
        return Ok(());
    }

    let url = notification_ws_url(
        &ctx.config.api.base_url,
        &ctx.config.notifications.ws_path,
        ctx.config.api.token.as_deref(),
    )?;
    let mut socket = NotificationSocket::spawn(SocketConfig {
        url,
        reconnect_delay: ctx.config.notifications.reconnect_delay(),
        max_reconnects: ctx.config.notifications.max_reconnects,
    });
    let mut states = socket.state_watcher();

    println!();
    println!("{}", style("Canlı bildirimler izleniyor (Ctrl+C ile çıkın)...").dim());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                match state {
                    ConnectionState::Open => println!("{}", style("● bağlı").green()),
                    ConnectionState::Connecting => println!("{}", style("○ bağlanıyor").yellow()),
                    ConnectionState::Closed => println!("{}", style("○ bağlantı kesildi").red()),
                }
            }
            event = socket.next_event() => {
                let Some(event) = event else { break };
                if let NotificationEvent::NotificationCreated { notification } = &event {
                    print_notification(notification);
                }
                center.apply(event);
                println!("{}", style(format!("{} okunmamış", center.unread_count())).dim());
            }
        }
    }

    socket.close().await;
    Ok(())
}
