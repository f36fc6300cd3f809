//! 地址选择器：搜索框 + 静态地图
//!
//! 状态全部在 `LocationPicker` 中；组件负责防抖定时器、地理编码请求与浏览器定位。

use crate::components::geocoder;
use crate::config::AppConfig;
use crate::location::{LocationPicker, SEARCH_DEBOUNCE_MS};
use crate::mount::MountGuard;
use crate::web::geolocation::current_position;
use crate::web::timer::DebounceTimer;
use autoserve_shared::{Coordinates, GeoFeature, Location};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 移动标记后反向地理编码；只采用最新一次的结果
fn resolve_pin(
    picker: RwSignal<LocationPicker>,
    guard: MountGuard,
    on_change: Callback<Location>,
    ticket: u64,
    at: Coordinates,
) {
    spawn_local(async move {
        let result = geocoder().reverse(at).await;
        if !guard.is_mounted() {
            return;
        }
        match result {
            Ok(Some(place_name)) => {
                let mut applied = None;
                picker.update(|p| applied = p.apply_reverse(ticket, &place_name));
                if let Some(location) = applied {
                    on_change.run(location);
                }
            }
            Ok(None) | Err(_) => picker.update(|p| p.reverse_failed(ticket)),
        }
    });
}

#[component]
pub fn LocationPickerField(
    picker: RwSignal<LocationPicker>,
    /// 地址与坐标同时变化时回调
    on_change: Callback<Location>,
) -> impl IntoView {
    let config = AppConfig::from_build_env();
    let mounted = StoredValue::new_local(MountGuard::new());
    let timer = StoredValue::new_local(DebounceTimer::new());
    on_cleanup(move || {
        mounted.with_value(MountGuard::unmount);
        timer.with_value(DebounceTimer::cancel);
    });

    // 每次挂载只请求一次定位
    let mut first_request = false;
    picker.update(|p| first_request = p.begin_geolocation());
    if first_request {
        let guard = mounted.get_value();
        current_position(move |at| {
            if !guard.is_mounted() {
                return;
            }
            let mut ticket = 0;
            picker.update(|p| ticket = p.move_pin(at));
            resolve_pin(picker, guard, on_change, ticket, at);
        });
    }

    let on_query = move |ev: leptos::ev::Event| {
        let text = event_target_value(&ev);
        let mut ticket = None;
        picker.update(|p| ticket = p.type_query(&text));
        let Some(ticket) = ticket else {
            return;
        };

        let guard = mounted.get_value();
        timer.with_value(|t| {
            t.schedule(SEARCH_DEBOUNCE_MS, move || {
                if !guard.is_mounted() {
                    return;
                }
                let Some(query) = picker.with_untracked(|p| p.search_due(ticket)) else {
                    return;
                };
                spawn_local(async move {
                    if let Ok(features) = geocoder().forward(&query).await {
                        if guard.is_mounted() {
                            picker.update(|p| {
                                p.apply_results(ticket, features);
                            });
                        }
                    }
                });
            })
        });
    };

    let on_select = move |feature: GeoFeature| {
        let mut location = Location::default();
        picker.update(|p| location = p.select_result(&feature));
        on_change.run(location);
    };

    let on_map_click = move |ev: leptos::web_sys::MouseEvent| {
        let (px, py) = (f64::from(ev.offset_x()), f64::from(ev.offset_y()));
        let mut clicked = None;
        picker.update(|p| clicked = Some(p.click_map(px, py)));
        if let Some((at, ticket)) = clicked {
            resolve_pin(picker, mounted.get_value(), on_change, ticket, at);
        }
    };

    let map_url = move || {
        picker.with(|p| {
            p.viewport().static_image_url(
                &config.geocoding_base_url,
                &config.map_style,
                &config.mapbox_token,
                p.marker(),
            )
        })
    };
    let (width, height) = picker.with_untracked(|p| (p.viewport().width, p.viewport().height));

    view! {
        <div class="form-control gap-2">
            <label class="label"><span class="label-text">"Service location"</span></label>
            <div class="dropdown w-full">
                <input
                    type="text"
                    placeholder="Search for an address"
                    class="input input-bordered w-full"
                    on:input=on_query
                    prop:value=move || picker.with(|p| p.query().to_string())
                />
                <Show when=move || picker.with(|p| !p.results().is_empty())>
                    <ul class="dropdown-content menu bg-base-100 rounded-box shadow w-full z-20">
                        <For
                            each=move || picker.with(|p| p.results().to_vec())
                            key=|f| f.id.clone()
                            children=move |feature| {
                                let label = feature.place_name.clone();
                                view! {
                                    <li><a on:click=move |_| on_select(feature.clone())>{label}</a></li>
                                }
                            }
                        />
                    </ul>
                </Show>
            </div>
            <img
                src=map_url
                width=width
                height=height
                alt="Map: click to place the service pin"
                class="rounded-box cursor-crosshair"
                on:click=on_map_click
            />
            <p class="text-xs text-base-content/60">
                {move || picker.with(|p| {
                    p.location()
                        .coordinates
                        .map(|c| format!("{:.5}, {:.5}", c.lat, c.lng))
                        .unwrap_or_else(|| "No location selected".to_string())
                })}
            </p>
        </div>
    }
}
