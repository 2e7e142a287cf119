use cp_common::{CommonError, DashboardConfig, FetchResponse, SubmissionRecord};
use serde::{Deserialize, Serialize};
use submission_filter::FilterParams;
use submission_stats::{GeometrySnapshot, ItemEmphasis, ItemPosition, TimerHandle, ViewportGeometry};
use wasm_bindgen::prelude::*;
use web_sys::console;

// 导出模块
pub mod error;
pub mod state;
pub mod view;

pub use error::{DashboardError, Result};
pub use state::{Dashboard, FetchOutcome, FetchTicket};
pub use view::{DashboardCharts, EmptyState, ListView, SubmissionCard, YearView};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// 初始化函数 - 设置错误处理
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// 版本信息
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// 滚动控件的几何信息 - 由前端以JSON传入
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct GeometryInput {
    pub viewport: ViewportGeometry,
    pub items: Vec<ItemPosition>,
}

/// 年份选择器的渲染更新
#[derive(Serialize, Debug)]
pub struct YearUpdate {
    /// 需要滚动到的位置
    pub scroll_top: Option<f64>,
    pub selected_year: Option<i32>,
    pub focused_year: Option<i32>,
    pub emphasis: Vec<ItemEmphasis>,
}

/// 请求结束后的渲染更新
#[derive(Serialize, Debug)]
pub struct FetchUpdate {
    pub outcome: FetchOutcome,
    pub years: YearUpdate,
}

fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&format!("序列化结果失败: {}", e)))
}

fn js_error(message: String) -> JsValue {
    console::log_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

/// 解析几何信息，空字符串表示控件尚未渲染
fn parse_geometry(json: &str) -> std::result::Result<GeometrySnapshot, JsValue> {
    if json.trim().is_empty() {
        return Ok(GeometrySnapshot::default());
    }
    let input: GeometryInput = serde_json::from_str(json)
        .map_err(|e| js_error(format!("解析几何信息失败: {}", e)))?;
    Ok(GeometrySnapshot::new(input.viewport, input.items))
}

/// 仪表盘JS接口
#[wasm_bindgen]
pub struct DashboardJS {
    inner: Dashboard,
}

#[wasm_bindgen]
impl DashboardJS {
    /// 以配置JSON创建仪表盘，空字符串使用默认配置
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> std::result::Result<DashboardJS, JsValue> {
        let config = DashboardConfig::from_json(config_json)
            .map_err(|e| js_error(format!("初始化仪表盘失败: {}", e)))?;
        let inner = Dashboard::new(config).map_err(|e| js_error(e.to_string()))?;
        Ok(DashboardJS { inner })
    }

    /// 开始请求，返回票据
    #[wasm_bindgen]
    pub fn begin_fetch(&mut self, handle: &str) -> std::result::Result<u32, JsValue> {
        self.inner
            .begin_fetch(handle)
            .map(|ticket| ticket.0)
            .map_err(|e| js_error(e.to_string()))
    }

    /// 以数据源响应JSON结束请求，同时按年份控件的几何信息居中选中年份
    #[wasm_bindgen]
    pub fn complete_fetch(
        &mut self,
        ticket: u32,
        response_json: &str,
        geometry_json: &str,
    ) -> std::result::Result<JsValue, JsValue> {
        let mut snapshot = parse_geometry(geometry_json)?;
        let result = FetchResponse::from_json(response_json)
            .and_then(FetchResponse::into_result)
            .map_err(|e| {
                if let CommonError::Json(detail) = &e {
                    console::log_1(&JsValue::from_str(&format!("解析数据源响应失败: {}", detail)));
                }
                e.into_user_facing()
            });
        let outcome = self.inner.complete_fetch(FetchTicket(ticket), result, &mut snapshot);
        to_js(&FetchUpdate {
            outcome,
            years: self.year_update(snapshot),
        })
    }

    /// 网络层失败时结束请求
    #[wasm_bindgen]
    pub fn fail_fetch(&mut self, ticket: u32, message: &str) -> std::result::Result<JsValue, JsValue> {
        let mut snapshot = GeometrySnapshot::default();
        let error = CommonError::DataSource(message.to_string());
        let outcome = self.inner.complete_fetch(FetchTicket(ticket), Err(error), &mut snapshot);
        to_js(&FetchUpdate {
            outcome,
            years: self.year_update(snapshot),
        })
    }

    /// 直接载入提交记录数组，返回年份控件的更新
    #[wasm_bindgen]
    pub fn load_records(&mut self, records_json: &str, geometry_json: &str) -> std::result::Result<JsValue, JsValue> {
        let records: Vec<SubmissionRecord> = serde_json::from_str(records_json)
            .map_err(|e| js_error(format!("解析提交记录失败: {}", e)))?;
        let mut snapshot = parse_geometry(geometry_json)?;
        self.inner.replace_collection(records, &mut snapshot);
        to_js(&self.year_update(snapshot))
    }

    #[wasm_bindgen]
    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    #[wasm_bindgen]
    pub fn error_message(&self) -> Option<String> {
        self.inner.error().map(str::to_string)
    }

    /// 应用筛选与排序，返回第一页
    #[wasm_bindgen]
    pub fn apply_filters(&mut self, params_json: &str) -> std::result::Result<JsValue, JsValue> {
        let params: FilterParams = serde_json::from_str(params_json)
            .map_err(|e| js_error(format!("解析参数失败: {}", e)))?;
        let sort = params.sort_spec();
        self.inner.apply(params.criteria, sort);
        to_js(&self.inner.list_view())
    }

    #[wasm_bindgen]
    pub fn reset_filters(&mut self) -> std::result::Result<JsValue, JsValue> {
        self.inner.reset_filters();
        to_js(&self.inner.list_view())
    }

    /// 跳转页码
    #[wasm_bindgen]
    pub fn go_to_page(&mut self, page: usize) -> std::result::Result<JsValue, JsValue> {
        self.inner
            .go_to_page(page)
            .map_err(|e| js_error(e.to_string()))?;
        to_js(&self.inner.list_view())
    }

    #[wasm_bindgen]
    pub fn list_view(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.list_view())
    }

    #[wasm_bindgen]
    pub fn filter_options(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.filter_options())
    }

    #[wasm_bindgen]
    pub fn charts(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.charts())
    }

    #[wasm_bindgen]
    pub fn years(&self) -> std::result::Result<JsValue, JsValue> {
        to_js(&self.inner.year_view())
    }

    /// 选中年份，返回滚动位置与强调效果
    #[wasm_bindgen]
    pub fn select_year(&mut self, year: i32, geometry_json: &str) -> std::result::Result<JsValue, JsValue> {
        let mut snapshot = parse_geometry(geometry_json)?;
        self.inner
            .select_year(year, &mut snapshot)
            .map_err(|e| js_error(e.to_string()))?;
        to_js(&self.year_update(snapshot))
    }

    /// 滚动事件，返回定时器句柄；前端在 scroll_delay_ms 后调用 on_timer
    #[wasm_bindgen]
    pub fn on_scroll(&mut self) -> u32 {
        self.inner.on_scroll().0
    }

    #[wasm_bindgen]
    pub fn scroll_delay_ms(&self) -> u32 {
        u32::try_from(self.inner.year_selector().debouncer().delay_ms()).unwrap_or(u32::MAX)
    }

    /// 定时器回调，句柄已过期时返回 null
    #[wasm_bindgen]
    pub fn on_timer(&mut self, handle: u32, geometry_json: &str) -> std::result::Result<JsValue, JsValue> {
        let mut snapshot = parse_geometry(geometry_json)?;
        if !self.inner.on_timer(TimerHandle(handle), &mut snapshot) {
            return Ok(JsValue::NULL);
        }
        to_js(&self.year_update(snapshot))
    }
}

impl DashboardJS {
    fn year_update(&self, snapshot: GeometrySnapshot) -> YearUpdate {
        let selector = self.inner.year_selector();
        YearUpdate {
            scroll_top: snapshot.scrolled_to,
            selected_year: selector.selected_year(),
            focused_year: selector.focused_year(),
            emphasis: snapshot.emphasis,
        }
    }
}
